pub mod overlay_model;
