pub mod drawing;
pub mod input;
pub mod raster;
