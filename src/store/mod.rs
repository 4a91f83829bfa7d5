pub(crate) mod dir;
pub(crate) mod sink;
