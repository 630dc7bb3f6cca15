pub(crate) mod brightness;
pub(crate) mod contrast;
pub(crate) mod dominant_color;
pub(crate) mod edge_density;
pub(crate) mod histogram;
