mod errors;
mod get_json;
mod multipart;
mod scenarios;
