mod breakpoint_persistence;
mod freeze_admission;
mod stage_tree;
mod test_utils;
