pub mod episode;
pub mod page;
pub mod profile;
pub mod training;

pub use episode::*;
pub use page::*;
pub use profile::*;
pub use training::*;
