#[macro_export]
macro_rules! test_with_server {
    ($name:ident, |$server:ident, $ctx_state:ident, $fakes:ident| $body:block) => {
        #[tokio::test(flavor = "multi_thread")]
        async fn $name() {
            #[allow(unused_variables)]
            let $fakes = $crate::helpers::Fakes::new();
            #[allow(unused_variables)]
            let $ctx_state = $fakes.ctx_state(Some($crate::helpers::REWARD_MINT));
            let $server = $crate::helpers::create_test_server(&$ctx_state);
            $body
        }
    };
}
