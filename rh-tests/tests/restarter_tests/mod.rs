mod bootstrap_tests;
mod recovery_tests;
