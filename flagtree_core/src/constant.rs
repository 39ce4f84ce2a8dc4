pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_WINDOWS_SHORT: char = '?';
pub(crate) const HELP_MESSAGE: &str = "Show this help message";
pub(crate) const HELP_GROUP: &str = "Help Options";
pub(crate) const ROOT_GROUP: &str = "Application Options";

pub(crate) const DOUBLE_DASH: &str = "--";
pub(crate) const MAP_DELIMITER: char = ':';

pub(crate) const NAMESPACE_DELIMITER: &str = ".";
pub(crate) const ENV_NAMESPACE_DELIMITER: &str = "_";
pub(crate) const SECTION_DELIMITER: &str = ".";

pub(crate) const DEFAULT_BASE: u32 = 10;
pub(crate) const DEFAULT_HELP_WIDTH: usize = 80;
