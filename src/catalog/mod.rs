pub(crate) mod decode;
pub(crate) mod dir;
pub(crate) mod memory;
pub(crate) mod source;
