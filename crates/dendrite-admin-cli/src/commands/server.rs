//! Server-wide admin operations.

use crate::client::{AppContext, CliResult};

pub(crate) async fn handle_reindex_events(ctx: &AppContext) -> CliResult<()> {
    ctx.admin.reindex_events().await?;
    println!("reindex requested");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use dendrite_admin_api::AdminClient;
    use httpmock::Method::POST;
    use httpmock::MockServer;

    #[tokio::test]
    async fn reindex_posts_to_the_admin_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/_dendrite/admin/fulltext/reindex");
            then.status(200).body("{}");
        });

        let base_url = server.base_url().parse().expect("valid URL");
        let ctx = AppContext {
            admin: AdminClient::builder(base_url, "syt_admin")
                .build()
                .expect("client builds"),
            output: OutputFormat::Table,
            assume_yes: true,
        };
        handle_reindex_events(&ctx).await.expect("reindex accepted");
        assert_eq!(mock.hits(), 1);
    }
}
