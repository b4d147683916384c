pub mod cities;
pub mod city_search;

pub use city_search::{
    rank_cities, CitySearchService, CitySource, DatabaseCitySource, StaticCitySource,
};
