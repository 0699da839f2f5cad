pub struct SystemDb {}

impl SystemDb {
    const MYSQL: [&str; 4] = ["information_schema", "mysql", "performance_schema", "sys"];

    pub fn is_system_db(db: &str) -> bool {
        Self::MYSQL.contains(&db)
    }

    pub fn get_system_dbs() -> Vec<&'static str> {
        Self::MYSQL.to_vec()
    }
}
