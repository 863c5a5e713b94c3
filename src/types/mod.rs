pub mod columns;
pub mod lat_lon;
pub mod records;
