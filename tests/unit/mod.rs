/// Unit tests exercising the public domain and analytics API
mod analytics_tests;
mod basic_tests;
