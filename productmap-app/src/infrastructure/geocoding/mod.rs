mod nominatim;
mod types;

pub use nominatim::NominatimGeocoder;
