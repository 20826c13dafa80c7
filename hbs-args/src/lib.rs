extern crate self as hbs_args;

pub use hbs_args_macros::args;
pub use hbs_args_macros::tag;
pub use hbs_args_parser::*;
