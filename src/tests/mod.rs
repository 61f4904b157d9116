// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

mod common_tests;
mod session_manager_tests;
