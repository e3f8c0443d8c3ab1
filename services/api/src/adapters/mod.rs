pub mod directus;

pub use directus::DirectusAdapter;
