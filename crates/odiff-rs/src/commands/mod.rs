mod compare;
mod init;
mod run;

pub use self::compare::{Outputs, compare, exit_code};
pub use self::init::init;
pub use self::run::run;
