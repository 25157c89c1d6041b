//! Interface names declared by objects on the bus. Anything else is
//! treated as navigation-only.

pub const ASSIGNABLE: &str = "io.tunectl.Assignable";
pub const DYNAMIC_READABLE: &str = "io.tunectl.DynamicReadable";
pub const STATIC_READABLE: &str = "io.tunectl.StaticReadable";
pub const GROUP: &str = "io.tunectl.Group";
