/* demos/demo.rs */

use clientip::{
    IpResolver, RequestParts, client_ip, client_public_ip, is_local_addr, remote_ip,
};

fn main() {
    println!("=== Client IP Resolution Examples ===\n");

    // Example 1: Local address classification
    example_1_classify();

    // Example 2: Remote socket address host
    example_2_remote_ip();

    // Example 3: Header priority for the client address
    example_3_client_ip();

    // Example 4: Public address behind proxies
    example_4_client_public_ip();

    // Example 5: Custom resolver configuration
    example_5_custom_resolver();

    println!("=== All examples completed! ===");
}

fn example_1_classify() {
    println!("Example 1: Local address classification");

    for addr in ["127.0.0.1", "::1", "10.168.9.18", "172.15.0.1", "172.16.0.1", "192.168.9.18", "89.5.6.1", "garbage"] {
        println!("  {:<14} local: {}", addr, is_local_addr(addr));
    }
    println!();
}

fn example_2_remote_ip() {
    println!("Example 2: Remote socket address host");

    for remote in ["101.1.0.4:100", "101.1.0.4:", "101.1.0.4", ":100", "[::1]:8080"] {
        println!("  {:<14} -> {:?}", remote, remote_ip(&RequestParts::new(remote)));
    }
    println!();
}

fn example_3_client_ip() {
    println!("Example 3: Header priority for the client address");

    let mut req = RequestParts::new("40.40.40.40:42123")
        .with_header("X-Real-IP", "10.10.10.10")
        .with_header("X-Forwarded-For", "20.20.20.20, 30.30.30.30");
    println!("  With both headers:        {}", client_ip(&req));

    req.remove_header("X-Forwarded-For");
    println!("  Without X-Forwarded-For:  {}", client_ip(&req));

    req.remove_header("X-Real-IP");
    println!("  Remote address only:      {}", client_ip(&req));
    println!();
}

fn example_4_client_public_ip() {
    println!("Example 4: Public address behind proxies");

    for (chain, remote) in [
        ("192.168.5.45, 172.24.9.1, 89.5.6.1", "101.1.0.4:100"),
        ("192.168.5.45, 172.24.9.1", "101.1.0.4:100"),
        ("", "127.0.0.1:42123"),
    ] {
        let req = RequestParts::new(remote).with_header("X-Forwarded-For", chain);
        match client_public_ip(&req).as_str() {
            "" => println!("  [{}] via {}: no public address", chain, remote),
            ip => println!("  [{}] via {}: {}", chain, remote, ip),
        }
    }
    println!();
}

fn example_5_custom_resolver() {
    println!("Example 5: Custom resolver configuration");

    let req = RequestParts::new("10.0.0.2:443")
        .with_header("X-Forwarded-For", "192.168.5.45, 210.45.9.1, 89.5.6.1")
        .with_header("CF-Connecting-IP", "198.51.100.42");

    println!("  Right-to-left scan: {}", IpResolver::new().client_public_ip(&req));
    println!(
        "  Left-to-right scan: {}",
        IpResolver::new()
            .scan_forwarded_from_left(true)
            .client_public_ip(&req)
    );

    let cloudflare = IpResolver::new()
        .with_forwarded_header("X-Original-Forwarded-For")
        .with_real_ip_header("CF-Connecting-IP");
    println!("  CF-Connecting-IP:   {}", cloudflare.client_ip(&req));
    println!();
}
