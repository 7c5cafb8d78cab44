//! CloudFormation template for the director's network stack

use crate::traits::stack_outputs;
use serde_json::{Value, json};

pub const KEY_PAIR_PARAMETER: &str = "SSHKeyPairName";

const VPC_CIDR: &str = "10.0.0.0/16";
const BOSH_SUBNET_CIDR: &str = "10.0.0.0/24";

/// Ports the operator reaches the director on
const DIRECTOR_INGRESS_PORTS: &[u16] = &[22, 6868, 25555];

/// Calls the director's AWS CPI makes with the generated IAM user
const CPI_ACTIONS: &[&str] = &[
    "ec2:AssociateAddress",
    "ec2:AttachVolume",
    "ec2:CreateVolume",
    "ec2:DeleteSnapshot",
    "ec2:DeleteVolume",
    "ec2:DescribeAddresses",
    "ec2:DescribeImages",
    "ec2:DescribeInstances",
    "ec2:DescribeRegions",
    "ec2:DescribeSecurityGroups",
    "ec2:DescribeSnapshots",
    "ec2:DescribeSubnets",
    "ec2:DescribeVolumes",
    "ec2:DetachVolume",
    "ec2:CreateSnapshot",
    "ec2:CreateTags",
    "ec2:RunInstances",
    "ec2:TerminateInstances",
    "ec2:RegisterImage",
    "ec2:DeregisterImage",
    "elasticloadbalancing:*",
];

pub fn render() -> Value {
    let ingress: Vec<Value> = DIRECTOR_INGRESS_PORTS
        .iter()
        .map(|port| {
            json!({
                "CidrIp": "0.0.0.0/0",
                "IpProtocol": "tcp",
                "FromPort": port,
                "ToPort": port
            })
        })
        .collect();

    let resources = json!({
        "VPC": {
            "Type": "AWS::EC2::VPC",
            "Properties": {
                "CidrBlock": VPC_CIDR,
                "Tags": [{ "Key": "Name", "Value": { "Ref": "AWS::StackName" } }]
            }
        },
        "VPCGatewayInternetGateway": { "Type": "AWS::EC2::InternetGateway" },
        "VPCGatewayAttachment": {
            "Type": "AWS::EC2::VPCGatewayAttachment",
            "Properties": {
                "VpcId": { "Ref": "VPC" },
                "InternetGatewayId": { "Ref": "VPCGatewayInternetGateway" }
            }
        },
        "BOSHSubnet": {
            "Type": "AWS::EC2::Subnet",
            "Properties": {
                "VpcId": { "Ref": "VPC" },
                "CidrBlock": BOSH_SUBNET_CIDR,
                "AvailabilityZone": { "Fn::Select": ["0", { "Fn::GetAZs": { "Ref": "AWS::Region" } }] },
                "Tags": [{ "Key": "Name", "Value": "BOSH" }]
            }
        },
        "BOSHRouteTable": {
            "Type": "AWS::EC2::RouteTable",
            "Properties": { "VpcId": { "Ref": "VPC" } }
        },
        "BOSHRoute": {
            "Type": "AWS::EC2::Route",
            "DependsOn": "VPCGatewayAttachment",
            "Properties": {
                "DestinationCidrBlock": "0.0.0.0/0",
                "GatewayId": { "Ref": "VPCGatewayInternetGateway" },
                "RouteTableId": { "Ref": "BOSHRouteTable" }
            }
        },
        "BOSHSubnetRouteTableAssociation": {
            "Type": "AWS::EC2::SubnetRouteTableAssociation",
            "Properties": {
                "RouteTableId": { "Ref": "BOSHRouteTable" },
                "SubnetId": { "Ref": "BOSHSubnet" }
            }
        },
        "BOSHSecurityGroup": {
            "Type": "AWS::EC2::SecurityGroup",
            "Properties": {
                "VpcId": { "Ref": "VPC" },
                "GroupDescription": "BOSH",
                "SecurityGroupIngress": ingress,
                "SecurityGroupEgress": []
            }
        },
        "BOSHSecurityGroupSelfIngress": {
            "Type": "AWS::EC2::SecurityGroupIngress",
            "Properties": {
                "GroupId": { "Ref": "BOSHSecurityGroup" },
                "SourceSecurityGroupId": { "Ref": "BOSHSecurityGroup" },
                "IpProtocol": "-1",
                "FromPort": 0,
                "ToPort": 65535
            }
        },
        "BOSHEIP": {
            "Type": "AWS::EC2::EIP",
            "DependsOn": "VPCGatewayAttachment",
            "Properties": { "Domain": "vpc" }
        },
        "BOSHUser": {
            "Type": "AWS::IAM::User",
            "Properties": {
                "Policies": [{
                    "PolicyName": "aws-cpi",
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Action": CPI_ACTIONS,
                            "Resource": "*"
                        }]
                    }
                }]
            }
        },
        "BOSHUserAccessKey": {
            "Type": "AWS::IAM::AccessKey",
            "Properties": { "UserName": { "Ref": "BOSHUser" } }
        }
    });

    let outputs = json!({
        (stack_outputs::VPC_ID): { "Value": { "Ref": "VPC" } },
        (stack_outputs::SUBNET): { "Value": { "Ref": "BOSHSubnet" } },
        (stack_outputs::SUBNET_AZ): { "Value": { "Fn::GetAtt": ["BOSHSubnet", "AvailabilityZone"] } },
        (stack_outputs::ELASTIC_IP): { "Value": { "Ref": "BOSHEIP" } },
        (stack_outputs::USER_ACCESS_KEY): { "Value": { "Ref": "BOSHUserAccessKey" } },
        (stack_outputs::USER_SECRET_ACCESS_KEY): { "Value": { "Fn::GetAtt": ["BOSHUserAccessKey", "SecretAccessKey"] } },
        (stack_outputs::SECURITY_GROUP): { "Value": { "Ref": "BOSHSecurityGroup" } }
    });

    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": "Infrastructure for a BOSH deployment.",
        "Parameters": {
            (KEY_PAIR_PARAMETER): {
                "Type": "AWS::EC2::KeyPair::KeyName",
                "Description": "SSH Keypair to use for instances"
            }
        },
        "Resources": resources,
        "Outputs": outputs
    })
}
