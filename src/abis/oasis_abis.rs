use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    /// Delegated execution account. Runs `_data` against `_target` in its own context.
    #[sol(rpc)]
    contract DSProxy {
        function execute(address _target, bytes _data) external payable returns (bytes32 response);
    }
}

sol! {
    #[sol(rpc)]
    contract ProxyRegistry {
        function proxies(address owner) external view returns (address);
        function build() external returns (address proxy);
    }
}
