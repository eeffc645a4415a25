/// Skip a test if no redis server is configured.
#[macro_export]
macro_rules! skip_without_redis {
    () => {
        if std::env::var("CRYPTIC_TEST_REDIS").is_err() {
            eprintln!("SKIPPED: CRYPTIC_TEST_REDIS not set (set to ip:port of a test server)");
            return;
        }
    };
}

/// Skip a test if no MySQL server is configured.
#[macro_export]
macro_rules! skip_without_mysql {
    () => {
        if std::env::var("CRYPTIC_TEST_MYSQL_HOST").is_err() {
            eprintln!("SKIPPED: CRYPTIC_TEST_MYSQL_HOST not set (set to ip:port of a test server)");
            return;
        }
    };
}

/// Skip a test if AWS credentials are not configured.
#[macro_export]
macro_rules! skip_without_aws {
    () => {
        if std::env::var("AWS_ACCESS_KEY_ID").is_err() {
            eprintln!("SKIPPED: AWS_ACCESS_KEY_ID not set");
            return;
        }
        if std::env::var("CRYPTIC_TEST_KMS_KEY").is_err() {
            eprintln!("SKIPPED: CRYPTIC_TEST_KMS_KEY not set (set to an AWS KMS key ARN)");
            return;
        }
    };
}
