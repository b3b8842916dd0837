//! Log coloring that respects whether stderr is a terminal.
use crate::config::get_config;
use colored::Colorize;

/// Color text for log output, only when logging to a terminal.
pub trait MaybeColorize {
    fn green(&self) -> String;
    fn red(&self) -> String;
    fn purple(&self) -> String;
    fn yellow(&self) -> String;
}

macro_rules! maybe_color {
    ($name:ident) => {
        fn $name(&self) -> String {
            if get_config().general.tty {
                Colorize::$name(self.as_ref()).to_string()
            } else {
                self.as_ref().to_string()
            }
        }
    };
}

impl<T: AsRef<str> + ?Sized> MaybeColorize for T {
    maybe_color!(green);
    maybe_color!(red);
    maybe_color!(purple);
    maybe_color!(yellow);
}
