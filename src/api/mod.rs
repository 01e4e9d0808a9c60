// Data transfer types shared with other processes.

pub mod dto;
