pub mod instrument;
pub mod macros;
pub mod observation;
pub mod target;
pub mod time;

pub use instrument::*;
pub use observation::*;
pub use target::*;
pub use time::*;
