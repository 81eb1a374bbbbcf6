use strum::Display;

/// Steps of a rip, executed strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Phase {
    #[strum(serialize = "locate select-song")]
    LocateSelectSong,
    #[strum(serialize = "locate sound-main")]
    LocateSoundMain,
    #[strum(serialize = "locate sound-init")]
    LocateSoundInit,
    #[strum(serialize = "locate vsync")]
    LocateVsync,
    #[strum(serialize = "locate free space")]
    LocateFreeSpace,
    #[strum(serialize = "emit gsflib")]
    EmitMain,
    #[strum(serialize = "emit minigsfs")]
    EmitVariants,
    #[strum(serialize = "done")]
    Done,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::LocateSelectSong => Phase::LocateSoundMain,
            Phase::LocateSoundMain => Phase::LocateSoundInit,
            Phase::LocateSoundInit => Phase::LocateVsync,
            Phase::LocateVsync => Phase::LocateFreeSpace,
            Phase::LocateFreeSpace => Phase::EmitMain,
            Phase::EmitMain => Phase::EmitVariants,
            Phase::EmitVariants | Phase::Done => Phase::Done,
        }
    }

    /// Engine routine searched for by this phase, if it is a signature scan.
    pub fn routine(self) -> Option<&'static str> {
        match self {
            Phase::LocateSelectSong => Some("sappy_selectsongbynum"),
            Phase::LocateSoundMain => Some("sappy_main"),
            Phase::LocateSoundInit => Some("sappy_init"),
            Phase::LocateVsync => Some("sappy_vsync"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        let mut phase = Phase::LocateSelectSong;
        let mut seen = vec![phase];
        while phase != Phase::Done {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(seen.len(), 8);
        assert_eq!(seen[4], Phase::LocateFreeSpace);
        assert_eq!(Phase::Done.next(), Phase::Done);
    }

    #[test]
    fn test_only_scans_name_a_routine() {
        assert!(Phase::LocateFreeSpace.routine().is_none());
        assert_eq!(Phase::LocateSoundInit.routine(), Some("sappy_init"));
        assert_eq!(Phase::EmitMain.to_string(), "emit gsflib");
    }
}
