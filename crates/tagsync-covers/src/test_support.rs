use std::{path::PathBuf, sync::Mutex};

use crate::{CoverArtTarget, CoverInfo};

pub(crate) struct TestTrack {
    path: PathBuf,
    album: Option<String>,
    cover: Mutex<Option<CoverInfo>>,
}

impl TestTrack {
    pub(crate) fn new(path: PathBuf, album: Option<&str>) -> Self {
        TestTrack {
            path,
            album: album.map(str::to_owned),
            cover: Mutex::new(None),
        }
    }

    pub(crate) fn cover(&self) -> Option<CoverInfo> {
        self.cover.lock().unwrap().clone()
    }
}

impl CoverArtTarget for TestTrack {
    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn album(&self) -> Option<String> {
        self.album.clone()
    }

    fn set_cover_info(&self, info: CoverInfo) {
        *self.cover.lock().unwrap() = Some(info);
    }
}
