pub mod format;
pub mod input;
pub mod navigation;

pub use self::navigation::ZoomNavigator;
