use bon::Builder;
use tokio_util::sync::CancellationToken;
use vtn_domain::store::MutationOptions;

/// 请求上下文（Request Context）
///
/// 承载一次接口调用的横切信息：
/// - `correlation_id`：链路追踪标记，原样透传给变更监听器；
/// - `client_name`：调用方名称，仅用于日志；
/// - `suppress_notifications`：内部批量导入等场景下跳过监听器；
/// - `cancellation`：请求被放弃时的取消信号，只在提交前生效。
///
/// 典型用法：
/// ```rust
/// use vtn_application::context::RequestContext;
///
/// let ctx = RequestContext::builder()
///     .correlation_id("cor-123")
///     .client_name("ven-1")
///     .build();
/// assert_eq!(ctx.mutation_options().tracking(), Some("cor-123"));
/// ```
#[derive(Builder, Clone, Debug, Default)]
pub struct RequestContext {
    #[builder(into)]
    pub correlation_id: Option<String>,
    #[builder(into)]
    pub client_name: Option<String>,
    #[builder(default)]
    pub suppress_notifications: bool,
    pub cancellation: Option<CancellationToken>,
}

impl RequestContext {
    pub fn mutation_options(&self) -> MutationOptions {
        MutationOptions::builder()
            .skip_notifications(self.suppress_notifications)
            .maybe_tracking(self.correlation_id.clone())
            .maybe_cancellation(self.cancellation.clone())
            .build()
    }
}
