mod policy_tests;
mod process_tests;
