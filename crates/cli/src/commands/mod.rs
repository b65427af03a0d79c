pub mod conflicts;
pub mod facets;
pub mod selectors;
pub mod upgrade;
pub mod util;

pub use conflicts::*;
pub use facets::*;
pub use selectors::*;
pub use upgrade::*;
pub use util::*;
