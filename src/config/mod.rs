pub(crate) mod opts;
