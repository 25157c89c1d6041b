pub struct DiscoverArgs {
    pub json: bool,
}

pub struct WatchArgs {
    pub seconds: u64,
}

pub struct SetArgs {
    pub path: String,
    pub value: String,
}

pub struct RestoreArgs {
    pub path: String,
}
