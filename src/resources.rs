// This file contains the code for deciding how many CPU threads the pipeline and each of its
// stages can use.

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.


/// Headroom left for the launcher itself and the rest of the host when all (or more than all)
/// cores are requested.
const RESERVED_CORES: usize = 2;


pub fn set_cores(requested: usize, available: usize) -> usize {
    // Can go to zero (or would go negative) on tiny hosts, which ResourceAllocation::new guards.
    if requested >= available {
        available.saturating_sub(RESERVED_CORES)
    } else {
        requested
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAllocation {
    pub usable_cores: usize,
    pub high_cpu: usize,  // alignment and assembly
    pub mid_cpu: usize,   // read filtering
    pub low_cpu: usize,   // reporting
}

impl ResourceAllocation {
    /// Returns None if the host can't spare at least one core for the pipeline.
    pub fn new(requested: usize, available: usize) -> Option<Self> {
        let usable_cores = set_cores(requested, available);
        if usable_cores < 1 {
            return None;
        }
        Some(ResourceAllocation {
            usable_cores,
            high_cpu: usable_cores,
            mid_cpu: (requested / 2).max(1),
            low_cpu: 1,
        })
    }
}
