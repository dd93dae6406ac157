// Public API - what other modules can use
pub use descriptions::{random_description, SWEAR_DESCRIPTIONS};
pub use handlers::{
    add_swear, create_swear_jar, fetch_query, get_swear_jar_stats, get_swear_jar_trend,
    get_swear_jars, request_for, search_users, update_swear_jar,
};
pub use queries::{Mutation, QueryKey};
pub use types::{
    AddSwearRequest, CreateJarRequest, JarBody, SwearBody, TrendPeriod, UpdateJarRequest, User,
};

// Internal modules
mod descriptions;
mod handlers;
mod queries;
mod types;
