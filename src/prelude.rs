#[allow(unused_imports)]
pub(crate) use crate::error::{Error, Result};
#[allow(unused_imports)]
pub(crate) use log::{debug, info, trace, warn};
