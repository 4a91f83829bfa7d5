pub(crate) mod collage_session;
