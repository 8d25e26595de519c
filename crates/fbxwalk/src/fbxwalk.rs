pub struct Fbxwalk {}

static FBXWALK_STATIC: std::sync::OnceLock<FbxwalkStatic> = std::sync::OnceLock::new();

struct FbxwalkStatic {}

impl FbxwalkStatic {
    fn init(app_name: &str) -> &'static Self {
        puffin::profile_function!();

        FBXWALK_STATIC.get_or_init(|| {
            env_logger::builder()
                .filter_level(log::LevelFilter::Info)
                .parse_default_env()
                .init();

            log::debug!("Logging initialized for {}", app_name);
            Self {}
        })
    }
}

impl Fbxwalk {
    /// Sets up process wide logging. Later calls reuse the first setup.
    pub fn new(app_name: &str) -> Self {
        FbxwalkStatic::init(app_name);

        Self {}
    }
}
