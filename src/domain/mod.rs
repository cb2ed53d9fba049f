mod cell;
mod clock;
mod session;
mod sync;
mod timeline;

pub use cell::*;
pub use clock::*;
pub use session::*;
pub use sync::*;
pub use timeline::*;
