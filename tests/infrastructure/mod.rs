mod memory_repository_test;
mod response_parsing_test;
