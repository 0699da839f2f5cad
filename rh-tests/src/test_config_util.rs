pub struct TestConfigUtil {}

impl TestConfigUtil {
    pub fn get_project_root() -> String {
        project_root::get_project_root()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    /// Path of a fixture under rh-tests, e.g. `config/task_config.ini`.
    pub fn get_absolute_path(relative_path: &str) -> String {
        format!("{}/rh-tests/{}", Self::get_project_root(), relative_path)
    }
}
