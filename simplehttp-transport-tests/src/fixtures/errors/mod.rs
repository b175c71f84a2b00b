mod invalid_json;
mod unsuccessful_status;
