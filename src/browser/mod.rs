pub mod config;
pub mod context;
pub mod driver;
pub mod webdriver;

pub use config::{BrowserOptions, BrowserOverrides, SessionDescriptor, SessionOpts, WindowSize, WindowSizeInput};
pub use context::BrowserContext;
pub use driver::{BrowserDriver, BrowserHandle, BrowserLauncher, ElementRef};
pub use webdriver::{WebDriverLauncher, WebDriverSession};
