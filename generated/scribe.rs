#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoVectorClock {
    /// One slot per cluster node, indexed by node id.
    #[prost(uint64, repeated, tag = "1")]
    pub entries: ::prost::alloc::vec::Vec<u64>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOperation {
    #[prost(sint64, tag = "1")]
    pub position: i64,
    #[prost(string, tag = "2")]
    pub owner: ::prost::alloc::string::String,
    /// Absent for clients that don't track causality.
    #[prost(message, optional, tag = "3")]
    pub clock: ::core::option::Option<ProtoVectorClock>,
    #[prost(oneof = "proto_operation::Edit", tags = "4, 5, 6")]
    pub edit: ::core::option::Option<proto_operation::Edit>,
}
/// Nested message and enum types in `ProtoOperation`.
pub mod proto_operation {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Edit {
        #[prost(message, tag = "4")]
        Insert(super::ProtoInsert),
        #[prost(message, tag = "5")]
        Delete(super::ProtoDelete),
        #[prost(message, tag = "6")]
        Replace(super::ProtoReplace),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoInsert {
    #[prost(string, tag = "1")]
    pub payload: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDelete {
    /// The payload's character count is the number of characters to remove.
    #[prost(string, tag = "1")]
    pub payload: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReplace {
    /// Encoded as "<deleteLength>|<insertText>".
    #[prost(string, tag = "1")]
    pub payload: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDocumentSnapshot {
    #[prost(string, tag = "1")]
    pub content: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub clock: ::core::option::Option<ProtoVectorClock>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDocumentUpdate {
    #[prost(string, tag = "1")]
    pub content: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub clock: ::core::option::Option<ProtoVectorClock>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoExecuteOperationReq {
    #[prost(message, optional, tag = "1")]
    pub operation: ::core::option::Option<ProtoOperation>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoExecuteOperationResult {
    #[prost(oneof = "proto_execute_operation_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_execute_operation_result::Result>,
}
/// Nested message and enum types in `ProtoExecuteOperationResult`.
pub mod proto_execute_operation_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoExecuteOperationSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoExecuteOperationError),
    }
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoExecuteOperationSuccess {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoExecuteOperationError {
    #[prost(oneof = "proto_execute_operation_error::Err", tags = "1, 2")]
    pub err: ::core::option::Option<proto_execute_operation_error::Err>,
}
/// Nested message and enum types in `ProtoExecuteOperationError`.
pub mod proto_execute_operation_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        NoLeader(super::ProtoNoLeader),
        #[prost(message, tag = "2")]
        Durability(super::ProtoDurabilityFault),
    }
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNoLeader {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDurabilityFault {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterClientReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatReq {}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoApplyReplicationReq {
    #[prost(message, optional, tag = "1")]
    pub state: ::core::option::Option<ProtoDocumentSnapshot>,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoApplyReplicationReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDeclareLeaderReq {
    #[prost(uint32, tag = "1")]
    pub leader_id: u32,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDeclareLeaderReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoBecomeLeaderReq {
    #[prost(message, optional, tag = "1")]
    pub state: ::core::option::Option<ProtoDocumentSnapshot>,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoBecomeLeaderReply {}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetCurrentStateReq {}
#[doc = r" Generated client implementations."]
pub mod grpc_scribe_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    pub struct GrpcScribeClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcScribeClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcScribeClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        #[doc = " Client/backup -> leader: apply an edit and replicate it."]
        pub async fn execute_operation(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoExecuteOperationReq>,
        ) -> Result<tonic::Response<super::ProtoExecuteOperationResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/scribe.GrpcScribe/ExecuteOperation");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Client -> any node: subscribe to document updates. The first streamed"]
        #[doc = " message is the current snapshot."]
        pub async fn register_client(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoRegisterClientReq>,
        ) -> Result<
            tonic::Response<tonic::codec::Streaming<super::ProtoDocumentUpdate>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/scribe.GrpcScribe/RegisterClient");
            self.inner
                .server_streaming(request.into_request(), path, codec)
                .await
        }
        #[doc = " Peer -> peer liveness probe. No side effects."]
        pub async fn heartbeat(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoHeartbeatReq>,
        ) -> Result<tonic::Response<super::ProtoHeartbeatReply>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/scribe.GrpcScribe/Heartbeat");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Leader -> backup one-hop state push."]
        pub async fn apply_replication(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoApplyReplicationReq>,
        ) -> Result<tonic::Response<super::ProtoApplyReplicationReply>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/scribe.GrpcScribe/ApplyReplication");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " New leader -> peers role announcement."]
        pub async fn declare_leader(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoDeclareLeaderReq>,
        ) -> Result<tonic::Response<super::ProtoDeclareLeaderReply>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/scribe.GrpcScribe/DeclareLeader");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Election sync: install this state and take leadership."]
        pub async fn become_leader(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoBecomeLeaderReq>,
        ) -> Result<tonic::Response<super::ProtoBecomeLeaderReply>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/scribe.GrpcScribe/BecomeLeader");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Election sync: read a peer's current state."]
        pub async fn get_current_state(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoGetCurrentStateReq>,
        ) -> Result<tonic::Response<super::ProtoDocumentSnapshot>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/scribe.GrpcScribe/GetCurrentState");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcScribeClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcScribeClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcScribeClient {{ ... }}")
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_scribe_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcScribeServer."]
    #[async_trait]
    pub trait GrpcScribe: Send + Sync + 'static {
        #[doc = " Client/backup -> leader: apply an edit and replicate it."]
        async fn execute_operation(
            &self,
            request: tonic::Request<super::ProtoExecuteOperationReq>,
        ) -> Result<tonic::Response<super::ProtoExecuteOperationResult>, tonic::Status>;
        #[doc = "Server streaming response type for the RegisterClient method."]
        type RegisterClientStream: futures_core::Stream<Item = Result<super::ProtoDocumentUpdate, tonic::Status>>
            + Send
            + Sync
            + 'static;
        #[doc = " Client -> any node: subscribe to document updates. The first streamed"]
        #[doc = " message is the current snapshot."]
        async fn register_client(
            &self,
            request: tonic::Request<super::ProtoRegisterClientReq>,
        ) -> Result<tonic::Response<Self::RegisterClientStream>, tonic::Status>;
        #[doc = " Peer -> peer liveness probe. No side effects."]
        async fn heartbeat(
            &self,
            request: tonic::Request<super::ProtoHeartbeatReq>,
        ) -> Result<tonic::Response<super::ProtoHeartbeatReply>, tonic::Status>;
        #[doc = " Leader -> backup one-hop state push."]
        async fn apply_replication(
            &self,
            request: tonic::Request<super::ProtoApplyReplicationReq>,
        ) -> Result<tonic::Response<super::ProtoApplyReplicationReply>, tonic::Status>;
        #[doc = " New leader -> peers role announcement."]
        async fn declare_leader(
            &self,
            request: tonic::Request<super::ProtoDeclareLeaderReq>,
        ) -> Result<tonic::Response<super::ProtoDeclareLeaderReply>, tonic::Status>;
        #[doc = " Election sync: install this state and take leadership."]
        async fn become_leader(
            &self,
            request: tonic::Request<super::ProtoBecomeLeaderReq>,
        ) -> Result<tonic::Response<super::ProtoBecomeLeaderReply>, tonic::Status>;
        #[doc = " Election sync: read a peer's current state."]
        async fn get_current_state(
            &self,
            request: tonic::Request<super::ProtoGetCurrentStateReq>,
        ) -> Result<tonic::Response<super::ProtoDocumentSnapshot>, tonic::Status>;
    }
    #[derive(Debug)]
    pub struct GrpcScribeServer<T: GrpcScribe> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcScribe> GrpcScribeServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcScribeServer<T>
    where
        T: GrpcScribe,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/scribe.GrpcScribe/ExecuteOperation" => {
                    #[allow(non_camel_case_types)]
                    struct ExecuteOperationSvc<T: GrpcScribe>(pub Arc<T>);
                    impl<T: GrpcScribe> tonic::server::UnaryService<super::ProtoExecuteOperationReq>
                        for ExecuteOperationSvc<T>
                    {
                        type Response = super::ProtoExecuteOperationResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoExecuteOperationReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).execute_operation(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ExecuteOperationSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/scribe.GrpcScribe/RegisterClient" => {
                    #[allow(non_camel_case_types)]
                    struct RegisterClientSvc<T: GrpcScribe>(pub Arc<T>);
                    impl<T: GrpcScribe>
                        tonic::server::ServerStreamingService<super::ProtoRegisterClientReq>
                        for RegisterClientSvc<T>
                    {
                        type Response = super::ProtoDocumentUpdate;
                        type ResponseStream = T::RegisterClientStream;
                        type Future =
                            BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoRegisterClientReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).register_client(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1;
                        let inner = inner.0;
                        let method = RegisterClientSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.server_streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/scribe.GrpcScribe/Heartbeat" => {
                    #[allow(non_camel_case_types)]
                    struct HeartbeatSvc<T: GrpcScribe>(pub Arc<T>);
                    impl<T: GrpcScribe> tonic::server::UnaryService<super::ProtoHeartbeatReq> for HeartbeatSvc<T> {
                        type Response = super::ProtoHeartbeatReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoHeartbeatReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).heartbeat(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = HeartbeatSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/scribe.GrpcScribe/ApplyReplication" => {
                    #[allow(non_camel_case_types)]
                    struct ApplyReplicationSvc<T: GrpcScribe>(pub Arc<T>);
                    impl<T: GrpcScribe> tonic::server::UnaryService<super::ProtoApplyReplicationReq>
                        for ApplyReplicationSvc<T>
                    {
                        type Response = super::ProtoApplyReplicationReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoApplyReplicationReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).apply_replication(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ApplyReplicationSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/scribe.GrpcScribe/DeclareLeader" => {
                    #[allow(non_camel_case_types)]
                    struct DeclareLeaderSvc<T: GrpcScribe>(pub Arc<T>);
                    impl<T: GrpcScribe> tonic::server::UnaryService<super::ProtoDeclareLeaderReq>
                        for DeclareLeaderSvc<T>
                    {
                        type Response = super::ProtoDeclareLeaderReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoDeclareLeaderReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).declare_leader(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = DeclareLeaderSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/scribe.GrpcScribe/BecomeLeader" => {
                    #[allow(non_camel_case_types)]
                    struct BecomeLeaderSvc<T: GrpcScribe>(pub Arc<T>);
                    impl<T: GrpcScribe> tonic::server::UnaryService<super::ProtoBecomeLeaderReq>
                        for BecomeLeaderSvc<T>
                    {
                        type Response = super::ProtoBecomeLeaderReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoBecomeLeaderReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).become_leader(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = BecomeLeaderSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/scribe.GrpcScribe/GetCurrentState" => {
                    #[allow(non_camel_case_types)]
                    struct GetCurrentStateSvc<T: GrpcScribe>(pub Arc<T>);
                    impl<T: GrpcScribe> tonic::server::UnaryService<super::ProtoGetCurrentStateReq>
                        for GetCurrentStateSvc<T>
                    {
                        type Response = super::ProtoDocumentSnapshot;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoGetCurrentStateReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).get_current_state(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = GetCurrentStateSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcScribe> Clone for GrpcScribeServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcScribe> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcScribe> tonic::transport::NamedService for GrpcScribeServer<T> {
        const NAME: &'static str = "scribe.GrpcScribe";
    }
}
