pub mod engine;
pub mod link;
pub mod pump;

pub use engine::{IsdnCallErr, IsdnErr, IsdnSpan};
pub use link::{DchanIo, LinkErr, Q921Link, WaitStatus};
