pub mod domain;
pub mod interstitial;
pub mod result;
pub mod text;

pub use interstitial::{InterstitialMatch, Strategy};
pub use result::ResolutionResult;
