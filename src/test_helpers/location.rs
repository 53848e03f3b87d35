use crate::{
    models::{LocationListing, ServiceLocation},
    providers::StaticLocationDirectory,
};

fn to_locations(pairs: &[(&str, &str)]) -> Vec<ServiceLocation> {
    pairs.iter().map(|(id, label)| ServiceLocation::new(*id, *label)).collect()
}

/// Creates a listing from `(id, label)` pairs for the public and private
/// catalogs.
pub fn location_listing(public: &[(&str, &str)], private: &[(&str, &str)]) -> LocationListing {
    LocationListing {
        public_locations: to_locations(public),
        private_locations: to_locations(private),
    }
}

/// Creates a static directory from `(id, label)` pairs.
pub fn create_test_location_directory(
    public: &[(&str, &str)],
    private: &[(&str, &str)],
) -> StaticLocationDirectory {
    StaticLocationDirectory::new(location_listing(public, private))
}
