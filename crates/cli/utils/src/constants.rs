pub const BEDROCK_CONFIG_FILE: &str = "bedrock.toml";

pub const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:5005";
pub const DEFAULT_LOCAL_WS_URL: &str = "ws://localhost:6006";

pub const CONTAINER_NAME: &str = "bedrock-xrpl-node";
pub const CONTAINER_ENGINE: &str = "docker";
pub const DEFAULT_DOCKER_IMAGE: &str = "transia/alphanet:latest";
pub const DEFAULT_NODE_CONFIG_DIR: &str = ".bedrock/node-config";
pub const GENESIS_FILE: &str = "genesis.json";

/// Ports published by the node container: websocket, admin RPC, peer.
pub const NODE_PORTS: [u16; 3] = [6006, 5005, 51235];
