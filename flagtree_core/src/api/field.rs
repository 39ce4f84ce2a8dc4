use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;

use crate::api::capture::*;
use crate::constant::MAP_DELIMITER;
use crate::error::Error;
use crate::prelude::{Collectable, FlagValue, Mappable};

/// A parameter that takes a single value, the last occurrence wins.
///
/// A `bool` scalar forms a flag that takes no argument.
pub struct Scalar<'a, T> {
    variable: &'a mut T,
    initial: T,
}

impl<'a, T> CliPositional for Scalar<'a, T> {}

impl<'a, T: Clone> Scalar<'a, T> {
    /// Create a scalar parameter.
    pub fn new(variable: &'a mut T) -> Self {
        let initial = variable.clone();
        Self { variable, initial }
    }
}

impl<'a, T> Capturable for Scalar<'a, T>
where
    T: FlagValue + Clone,
{
    fn kind(&self) -> ValueKind {
        if T::is_boolean() {
            ValueKind::Boolean { repeated: false }
        } else {
            ValueKind::Single
        }
    }

    fn capture(&mut self, token: Option<&str>, base: u32) -> Result<(), InvalidCapture> {
        *self.variable = convert(token, base)?;
        Ok(())
    }

    fn clear(&mut self) {
        // Do nothing; the next capture overwrites.
    }

    fn reset(&mut self) {
        *self.variable = self.initial.clone();
    }

    fn render(&self, base: u32) -> Vec<String> {
        vec![self.variable.format_flag(base)]
    }

    fn type_name(&self) -> String {
        T::type_description()
    }

    fn is_numeric(&self) -> bool {
        T::is_numeric()
    }
}

/// A parameter that takes no argument, setting the variable to `target` when given.
pub struct Switch<'a, T> {
    variable: &'a mut T,
    target: T,
    initial: T,
}

impl<'a, T: Clone> Switch<'a, T> {
    /// Create a switch parameter.
    pub fn new(variable: &'a mut T, target: T) -> Self {
        let initial = variable.clone();
        Self {
            variable,
            target,
            initial,
        }
    }
}

impl<'a, T> Capturable for Switch<'a, T>
where
    T: FlagValue + Clone,
{
    fn kind(&self) -> ValueKind {
        ValueKind::Boolean { repeated: false }
    }

    fn capture(&mut self, token: Option<&str>, base: u32) -> Result<(), InvalidCapture> {
        // Explicit values only arrive from defaults, the environment and INI files.
        *self.variable = match token {
            Some(token) => convert(Some(token), base)?,
            None => self.target.clone(),
        };
        Ok(())
    }

    fn clear(&mut self) {
        // Do nothing.
    }

    fn reset(&mut self) {
        *self.variable = self.initial.clone();
    }

    fn render(&self, base: u32) -> Vec<String> {
        vec![self.variable.format_flag(base)]
    }

    fn type_name(&self) -> String {
        T::type_description()
    }
}

/// A parameter that maps down to [`Option`], taking a single value.
pub struct Optional<'a, T> {
    variable: &'a mut Option<T>,
    initial: Option<T>,
}

impl<'a, T> CliPositional for Optional<'a, T> {}

impl<'a, T: Clone> Optional<'a, T> {
    /// Create an optional parameter.
    pub fn new(variable: &'a mut Option<T>) -> Self {
        let initial = variable.clone();
        Self { variable, initial }
    }
}

impl<'a, T> Capturable for Optional<'a, T>
where
    T: FlagValue + Clone,
{
    fn kind(&self) -> ValueKind {
        if T::is_boolean() {
            ValueKind::Boolean { repeated: false }
        } else {
            ValueKind::Single
        }
    }

    fn capture(&mut self, token: Option<&str>, base: u32) -> Result<(), InvalidCapture> {
        self.variable.replace(convert(token, base)?);
        Ok(())
    }

    fn clear(&mut self) {
        self.variable.take();
    }

    fn reset(&mut self) {
        *self.variable = self.initial.clone();
    }

    fn render(&self, base: u32) -> Vec<String> {
        self.variable
            .iter()
            .map(|value| value.format_flag(base))
            .collect()
    }

    fn type_name(&self) -> String {
        T::type_description()
    }

    fn is_numeric(&self) -> bool {
        T::is_numeric()
    }
}

/// A parameter that accumulates one value per occurrence.
///
/// A collection of `bool` forms a flag that takes no argument and records each occurrence.
pub struct Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    variable: &'a mut C,
    initial: C,
    _phantom: PhantomData<T>,
}

impl<'a, C, T> CliPositional for Collection<'a, C, T> where C: 'a + Collectable<T> {}

impl<'a, C, T> Collection<'a, C, T>
where
    C: 'a + Collectable<T> + Clone,
{
    /// Create a collection parameter.
    pub fn new(variable: &'a mut C) -> Self {
        let initial = variable.clone();
        Self {
            variable,
            initial,
            _phantom: PhantomData,
        }
    }
}

impl<'a, C, T> Capturable for Collection<'a, C, T>
where
    C: 'a + Collectable<T> + Clone,
    T: FlagValue,
{
    fn kind(&self) -> ValueKind {
        if T::is_boolean() {
            ValueKind::Boolean { repeated: true }
        } else {
            ValueKind::Repeated
        }
    }

    fn capture(&mut self, token: Option<&str>, base: u32) -> Result<(), InvalidCapture> {
        self.variable.add(convert(token, base)?);
        Ok(())
    }

    fn clear(&mut self) {
        <C as Collectable<T>>::clear(self.variable);
    }

    fn reset(&mut self) {
        *self.variable = self.initial.clone();
    }

    fn render(&self, base: u32) -> Vec<String> {
        self.variable
            .values()
            .into_iter()
            .map(|value| value.format_flag(base))
            .collect()
    }

    fn type_name(&self) -> String {
        T::type_description()
    }

    fn is_numeric(&self) -> bool {
        T::is_numeric()
    }
}

/// A parameter that collects lists of values, one list per terminated capture.
pub struct Nested<'a, T> {
    variable: &'a mut Vec<Vec<T>>,
    initial: Vec<Vec<T>>,
}

impl<'a, T: Clone> Nested<'a, T> {
    /// Create a nested parameter.
    pub fn new(variable: &'a mut Vec<Vec<T>>) -> Self {
        let initial = variable.clone();
        Self { variable, initial }
    }
}

impl<'a, T> Capturable for Nested<'a, T>
where
    T: FlagValue + Clone,
{
    fn kind(&self) -> ValueKind {
        ValueKind::Nested
    }

    fn capture(&mut self, token: Option<&str>, base: u32) -> Result<(), InvalidCapture> {
        let value = convert(token, base)?;

        match self.variable.last_mut() {
            Some(inner) => inner.push(value),
            None => self.variable.push(vec![value]),
        }

        Ok(())
    }

    fn clear(&mut self) {
        self.variable.clear();
    }

    fn reset(&mut self) {
        *self.variable = self.initial.clone();
    }

    fn begin_capture(&mut self) {
        self.variable.push(Vec::default());
    }

    fn render(&self, base: u32) -> Vec<String> {
        self.variable
            .iter()
            .flatten()
            .map(|value| value.format_flag(base))
            .collect()
    }

    fn type_name(&self) -> String {
        T::type_description()
    }
}

/// A parameter that collects `key:value` pairs.
pub struct Mapping<'a, M, K, V>
where
    M: 'a + Mappable<K, V>,
{
    variable: &'a mut M,
    initial: M,
    _phantom: PhantomData<(K, V)>,
}

impl<'a, M, K, V> Mapping<'a, M, K, V>
where
    M: 'a + Mappable<K, V> + Clone,
{
    /// Create a mapping parameter.
    pub fn new(variable: &'a mut M) -> Self {
        let initial = variable.clone();
        Self {
            variable,
            initial,
            _phantom: PhantomData,
        }
    }
}

impl<'a, M, K, V> Capturable for Mapping<'a, M, K, V>
where
    M: 'a + Mappable<K, V> + Clone,
    K: FlagValue,
    V: FlagValue,
{
    fn kind(&self) -> ValueKind {
        ValueKind::Map
    }

    fn capture(&mut self, token: Option<&str>, base: u32) -> Result<(), InvalidCapture> {
        let token = token.unwrap_or_default();
        let (key, value) = token.split_once(MAP_DELIMITER).unwrap_or((token, ""));
        let key = convert(Some(key), base)?;
        let value = convert(Some(value), base)?;
        self.variable.insert(key, value);
        Ok(())
    }

    fn clear(&mut self) {
        <M as Mappable<K, V>>::clear(self.variable);
    }

    fn reset(&mut self) {
        *self.variable = self.initial.clone();
    }

    fn render(&self, base: u32) -> Vec<String> {
        let mut entries: Vec<String> = self
            .variable
            .entries()
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}{MAP_DELIMITER}{}",
                    key.format_flag(base),
                    value.format_flag(base)
                )
            })
            .collect();
        entries.sort();
        entries
    }

    fn type_name(&self) -> String {
        format!("{}:{}", K::type_description(), V::type_description())
    }
}

/// A parameter that invokes an action each time it is given, taking no argument.
pub struct Callback<'a> {
    action: Box<dyn FnMut() -> Result<(), Error> + 'a>,
}

impl<'a> Callback<'a> {
    /// Create a callback parameter.
    pub fn new(action: impl FnMut() -> Result<(), Error> + 'a) -> Self {
        Self {
            action: Box::new(action),
        }
    }
}

impl<'a> Capturable for Callback<'a> {
    fn kind(&self) -> ValueKind {
        ValueKind::Callback { arity: 0 }
    }

    fn capture(&mut self, _token: Option<&str>, _base: u32) -> Result<(), InvalidCapture> {
        (self.action)()?;
        Ok(())
    }

    fn clear(&mut self) {
        // Do nothing.
    }

    fn reset(&mut self) {
        // Do nothing.
    }

    fn render(&self, _base: u32) -> Vec<String> {
        Vec::default()
    }

    fn type_name(&self) -> String {
        "callback".to_string()
    }
}

/// A parameter that hands its converted value to a handler each time it is given.
pub struct Handler<'a, T> {
    handler: Box<dyn FnMut(T) -> Result<(), Error> + 'a>,
}

impl<'a, T> Handler<'a, T> {
    /// Create a handler parameter.
    pub fn new(handler: impl FnMut(T) -> Result<(), Error> + 'a) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }
}

impl<'a, T: FlagValue> Capturable for Handler<'a, T> {
    fn kind(&self) -> ValueKind {
        ValueKind::Callback { arity: 1 }
    }

    fn capture(&mut self, token: Option<&str>, base: u32) -> Result<(), InvalidCapture> {
        let value = convert(token, base)?;
        (self.handler)(value)?;
        Ok(())
    }

    fn clear(&mut self) {
        // Do nothing.
    }

    fn reset(&mut self) {
        // Do nothing.
    }

    fn render(&self, _base: u32) -> Vec<String> {
        Vec::default()
    }

    fn type_name(&self) -> String {
        T::type_description()
    }

    fn is_numeric(&self) -> bool {
        T::is_numeric()
    }
}

impl<T> Collectable<T> for Vec<T> {
    fn add(&mut self, item: T) {
        self.push(item);
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn values(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T> Collectable<T> for VecDeque<T> {
    fn add(&mut self, item: T) {
        self.push_back(item);
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }

    fn values(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Eq + Hash> Collectable<T> for HashSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }

    fn clear(&mut self) {
        HashSet::clear(self);
    }

    fn values(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<T: Ord> Collectable<T> for BTreeSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }

    fn clear(&mut self) {
        BTreeSet::clear(self);
    }

    fn values(&self) -> Vec<&T> {
        self.iter().collect()
    }
}

impl<K: Eq + Hash, V> Mappable<K, V> for HashMap<K, V> {
    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}

impl<K: Ord, V> Mappable<K, V> for BTreeMap<K, V> {
    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }

    fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}
