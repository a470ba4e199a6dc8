pub mod github;
pub mod repos;



pub use github::configure_github_routes;
pub use repos::configure_repo_routes;
